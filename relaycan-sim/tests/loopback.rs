use embedded_can::{Frame as _, StandardId};
use relaycan_sim::{SimCan, SimCanError};
use relaycan_transport::{
    BusFrame, CanCore, CanEvents, FilterBank, FilterWord, Mailbox, RxFifo,
};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(500);
const QUIET: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Irq {
    TxComplete(usize),
    FifoPending(usize),
}

struct Recorder(Mutex<Sender<Irq>>);

impl Recorder {
    fn bind(can: &SimCan) -> Receiver<Irq> {
        let (tx, rx) = mpsc::channel();
        can.bind_interrupts(Arc::new(Recorder(Mutex::new(tx))));
        rx
    }
}

impl CanEvents for Recorder {
    fn tx_mailbox_complete(&self, mailbox: Mailbox) {
        let _ = self.0.lock().unwrap().send(Irq::TxComplete(mailbox.index()));
    }

    fn fifo_pending(&self, fifo: RxFifo) {
        let _ = self.0.lock().unwrap().send(Irq::FifoPending(fifo.index()));
    }
}

fn std_id(raw: u16) -> StandardId {
    StandardId::new(raw).unwrap()
}

fn frame(id: u16, data: &[u8]) -> BusFrame {
    BusFrame::new(std_id(id), data).unwrap()
}

fn exact(can: &SimCan, bank: u8, fifo: RxFifo, id: u16) {
    can.program_filter(
        FilterBank::new(bank),
        fifo,
        FilterWord::standard(std_id(id)),
        FilterWord::exact_standard_mask(),
    )
    .unwrap();
}

fn mailbox(index: u8) -> Mailbox {
    Mailbox::new(index).unwrap()
}

#[test]
fn transmitting_requires_a_started_controller() {
    let can = SimCan::new();
    assert_eq!(
        can.load_mailbox(mailbox(0), &frame(0x300, &[0xAA])),
        Err(SimCanError::NotStarted)
    );
}

#[test]
fn filter_banks_beyond_the_hardware_are_rejected() {
    let can = SimCan::new();
    let err = can
        .program_filter(
            FilterBank::new(14),
            RxFifo::Fifo0,
            FilterWord::standard(std_id(0x300)),
            FilterWord::exact_standard_mask(),
        )
        .unwrap_err();
    assert_eq!(err, SimCanError::BankOutOfRange { bank: 14, banks: 14 });
}

#[test]
fn exact_filter_never_delivers_other_identifiers() {
    let can = SimCan::new();
    let irqs = Recorder::bind(&can);
    exact(&can, 0, RxFifo::Fifo0, 0x301);
    can.start().unwrap();

    // A frame with a different standard identifier completes transmission but
    // reaches no FIFO.
    can.load_mailbox(mailbox(0), &frame(0x300, &[0xAA])).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::TxComplete(0));
    assert!(irqs.recv_timeout(QUIET).is_err());

    // The configured identifier goes through.
    can.load_mailbox(mailbox(0), &frame(0x301, &[1, 2])).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::TxComplete(0));
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::FifoPending(0));
    let received = can.recv_fifo(RxFifo::Fifo0).unwrap();
    assert_eq!(received.data(), &[1, 2]);
}

#[test]
fn suppressed_notifications_stay_silent_until_rearmed() {
    let can = SimCan::new();
    let irqs = Recorder::bind(&can);
    exact(&can, 0, RxFifo::Fifo0, 0x301);
    can.start().unwrap();
    can.set_fifo_notification(RxFifo::Fifo0, false).unwrap();

    can.load_mailbox(mailbox(0), &frame(0x301, &[1, 1])).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::TxComplete(0));
    assert!(irqs.recv_timeout(QUIET).is_err(), "no pending while disabled");

    // Re-enabling with a frame still queued raises the notification.
    can.set_fifo_notification(RxFifo::Fifo0, true).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::FifoPending(0));
    assert_eq!(can.recv_fifo(RxFifo::Fifo0).unwrap().data(), &[1, 1]);
}

#[test]
fn only_one_pending_notification_is_outstanding() {
    let can = SimCan::new();
    let irqs = Recorder::bind(&can);
    exact(&can, 0, RxFifo::Fifo0, 0x301);
    can.start().unwrap();

    can.load_mailbox(mailbox(0), &frame(0x301, &[1, 1])).unwrap();
    can.load_mailbox(mailbox(1), &frame(0x301, &[1, 2])).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::TxComplete(0));
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::FifoPending(0));
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::TxComplete(1));
    assert!(
        irqs.recv_timeout(QUIET).is_err(),
        "second frame must not raise another pending"
    );

    // The consumer drains one frame at a time, suppressing and re-arming as
    // the protocol nodes do.
    can.set_fifo_notification(RxFifo::Fifo0, false).unwrap();
    assert_eq!(can.recv_fifo(RxFifo::Fifo0).unwrap().data(), &[1, 1]);
    can.set_fifo_notification(RxFifo::Fifo0, true).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::FifoPending(0));
    assert_eq!(can.recv_fifo(RxFifo::Fifo0).unwrap().data(), &[1, 2]);
}

#[test]
fn first_matching_bank_routes_the_frame() {
    let can = SimCan::new();
    let irqs = Recorder::bind(&can);
    exact(&can, 0, RxFifo::Fifo0, 0x301);
    exact(&can, 1, RxFifo::Fifo1, 0x301);
    can.start().unwrap();

    can.load_mailbox(mailbox(0), &frame(0x301, &[9])).unwrap();
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::TxComplete(0));
    assert_eq!(irqs.recv_timeout(TIMEOUT).unwrap(), Irq::FifoPending(0));
    assert!(irqs.recv_timeout(QUIET).is_err(), "FIFO 1 must stay empty");
}

#[test]
fn tap_observes_frames_in_submission_order() {
    let can = SimCan::new();
    let tap = can.tap();
    can.start().unwrap();

    for (index, value) in [(0u8, 10u8), (1, 11), (2, 12)] {
        can.load_mailbox(mailbox(index), &frame(0x300, &[value])).unwrap();
    }
    for value in [10u8, 11, 12] {
        let seen = tap.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(seen.data(), &[value]);
    }
}
