use embedded_can::{Frame as EmbeddedFrame, Id};

/// Maximum payload length of a classic CAN data frame.
pub const MAX_FRAME_DATA: usize = 8;

/// A classic CAN 2.0 frame as it sits in a transmit mailbox or receive FIFO.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusFrame {
    id: Id,
    data: [u8; MAX_FRAME_DATA],
    dlc: u8,
    remote: bool,
}

impl BusFrame {
    /// Returns the CAN identifier for this frame.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns true if this is a remote frame.
    pub fn is_remote(&self) -> bool {
        self.remote
    }
}

impl EmbeddedFrame for BusFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_FRAME_DATA {
            return None;
        }
        let mut buf = [0u8; MAX_FRAME_DATA];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            id: id.into(),
            data: buf,
            dlc: data.len() as u8,
            remote: false,
        })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_FRAME_DATA {
            return None;
        }
        Some(Self {
            id: id.into(),
            data: [0u8; MAX_FRAME_DATA],
            dlc: dlc as u8,
            remote: true,
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc as usize
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.dlc as usize]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_can::StandardId;

    #[test]
    fn data_frame_truncates_view_to_dlc() {
        let frame = BusFrame::new(StandardId::new(0x300).unwrap(), &[0xAA]).unwrap();
        assert_eq!(frame.dlc(), 1);
        assert_eq!(frame.data(), &[0xAA]);
        assert!(!frame.is_remote_frame());
        assert!(!frame.is_extended());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        assert!(BusFrame::new(StandardId::new(0x300).unwrap(), &[0u8; 9]).is_none());
    }

    #[test]
    fn remote_frame_exposes_no_data() {
        let frame = BusFrame::new_remote(StandardId::new(0x7FF).unwrap(), 2).unwrap();
        assert_eq!(frame.dlc(), 2);
        assert!(frame.data().is_empty());
    }
}
