//! Wire messages and their binary framing.
//!
//! Frame layout, all little-endian:
//!
//! ```text
//! u32 body length | u16 category | [i32 x | i32 y]
//! ```
//!
//! Move and active-board messages carry exactly one integer pair; `Reset`
//! carries nothing.

use crate::error::ProtocolError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nested_tictactoe::{Coordinate, Position};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use tracing::warn;

/// Largest body a peer may announce.
pub const MAX_BODY_LEN: usize = 64;

/// Message category, in wire id order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, strum::EnumIter,
)]
pub enum MessageKind {
    /// A peer's move, sent to the host.
    MoveFromClient,
    /// A move broadcast by the host (its own or a relayed peer move).
    MoveToClient,
    /// The forced next sub-board, broadcast by the host.
    ActiveBoardToClient,
    /// The forced next sub-board, sent by a peer to the host.
    ActiveBoardFromClient,
    /// Host-authoritative reset.
    Reset,
}

impl MessageKind {
    /// Parses a wire id.
    pub fn from_u16(id: u16) -> Option<Self> {
        match id {
            0 => Some(MessageKind::MoveFromClient),
            1 => Some(MessageKind::MoveToClient),
            2 => Some(MessageKind::ActiveBoardToClient),
            3 => Some(MessageKind::ActiveBoardFromClient),
            4 => Some(MessageKind::Reset),
            _ => None,
        }
    }

    /// Wire id of this category.
    pub fn as_u16(self) -> u16 {
        match self {
            MessageKind::MoveFromClient => 0,
            MessageKind::MoveToClient => 1,
            MessageKind::ActiveBoardToClient => 2,
            MessageKind::ActiveBoardFromClient => 3,
            MessageKind::Reset => 4,
        }
    }

    /// Returns true for the host-to-peer categories.
    pub fn is_to_client(self) -> bool {
        matches!(
            self,
            MessageKind::MoveToClient | MessageKind::ActiveBoardToClient | MessageKind::Reset
        )
    }
}

/// The 2-D integer pair carried by move and active-board messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPair {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
}

impl GridPair {
    /// Creates a pair.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Flattens a two-level coordinate onto the 9×9 cell grid.
    pub fn from_coordinate(coord: Coordinate) -> Self {
        let (mc, mr, cc, cr) = coord.parts();
        Self {
            x: i32::from(mc) * 3 + i32::from(cc),
            y: i32::from(mr) * 3 + i32::from(cr),
        }
    }

    /// Splits a 9×9 grid pair back into a two-level coordinate.
    ///
    /// # Errors
    ///
    /// `ProtocolError::MalformedMessage` if either axis is outside `0..=8`.
    pub fn to_coordinate(self) -> Result<Coordinate, ProtocolError> {
        if !(0..9).contains(&self.x) || !(0..9).contains(&self.y) {
            return Err(ProtocolError::MalformedMessage(format!(
                "cell ({}, {}) outside 0..=8",
                self.x, self.y
            )));
        }
        Coordinate::from_parts(self.x / 3, self.y / 3, self.x % 3, self.y % 3)
            .map_err(|e| ProtocolError::MalformedMessage(e.to_string()))
    }

    /// Encodes a sub-board position.
    pub fn from_board(board: Position) -> Self {
        Self {
            x: i32::from(board.col()),
            y: i32::from(board.row()),
        }
    }

    /// Decodes a sub-board position.
    ///
    /// # Errors
    ///
    /// `ProtocolError::MalformedMessage` if either axis is outside `0..=2`.
    pub fn to_board(self) -> Result<Position, ProtocolError> {
        let axis = |v: i32| u8::try_from(v).ok().filter(|v| *v <= 2);
        axis(self.x)
            .zip(axis(self.y))
            .and_then(|(col, row)| Position::from_col_row(col, row))
            .ok_or_else(|| {
                ProtocolError::MalformedMessage(format!(
                    "board ({}, {}) outside 0..=2",
                    self.x, self.y
                ))
            })
    }
}

/// A decoded protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireMessage {
    /// A peer's move, sent to the host.
    MoveFromClient(Coordinate),
    /// A move broadcast by the host.
    MoveToClient(Coordinate),
    /// Forced next sub-board, broadcast by the host.
    ActiveBoardToClient(Position),
    /// Forced next sub-board, sent by a peer.
    ActiveBoardFromClient(Position),
    /// Host-authoritative reset.
    Reset,
}

impl WireMessage {
    /// Category of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            WireMessage::MoveFromClient(_) => MessageKind::MoveFromClient,
            WireMessage::MoveToClient(_) => MessageKind::MoveToClient,
            WireMessage::ActiveBoardToClient(_) => MessageKind::ActiveBoardToClient,
            WireMessage::ActiveBoardFromClient(_) => MessageKind::ActiveBoardFromClient,
            WireMessage::Reset => MessageKind::Reset,
        }
    }

    /// The integer pair this message carries, if any.
    pub fn payload(&self) -> Option<GridPair> {
        match self {
            WireMessage::MoveFromClient(coord) | WireMessage::MoveToClient(coord) => {
                Some(GridPair::from_coordinate(*coord))
            }
            WireMessage::ActiveBoardToClient(board) | WireMessage::ActiveBoardFromClient(board) => {
                Some(GridPair::from_board(*board))
            }
            WireMessage::Reset => None,
        }
    }

    /// Rebuilds a message from its category and raw payload.
    ///
    /// # Errors
    ///
    /// `ProtocolError::MalformedMessage` when the payload is missing or out
    /// of range for the category.
    pub fn from_parts(kind: MessageKind, payload: Option<GridPair>) -> Result<Self, ProtocolError> {
        let pair = || {
            payload.ok_or_else(|| {
                ProtocolError::MalformedMessage(format!("{kind} without a payload"))
            })
        };
        Ok(match kind {
            MessageKind::MoveFromClient => WireMessage::MoveFromClient(pair()?.to_coordinate()?),
            MessageKind::MoveToClient => WireMessage::MoveToClient(pair()?.to_coordinate()?),
            MessageKind::ActiveBoardToClient => {
                WireMessage::ActiveBoardToClient(pair()?.to_board()?)
            }
            MessageKind::ActiveBoardFromClient => {
                WireMessage::ActiveBoardFromClient(pair()?.to_board()?)
            }
            MessageKind::Reset => WireMessage::Reset,
        })
    }

    /// Writes the frame body (category and payload).
    pub fn write_body(&self, wtr: &mut impl Write) -> std::io::Result<()> {
        wtr.write_u16::<LittleEndian>(self.kind().as_u16())?;
        if let Some(pair) = self.payload() {
            wtr.write_i32::<LittleEndian>(pair.x)?;
            wtr.write_i32::<LittleEndian>(pair.y)?;
        }
        Ok(())
    }

    /// Writes a complete length-prefixed frame.
    pub fn pack(&self, wtr: &mut impl Write) -> std::io::Result<()> {
        let mut body = Vec::with_capacity(10);
        self.write_body(&mut body)?;
        wtr.write_u32::<LittleEndian>(body.len() as u32)?;
        wtr.write_all(&body)
    }

    /// Decodes a frame body.
    ///
    /// # Errors
    ///
    /// `ProtocolError::MalformedMessage` for unknown categories, truncated or
    /// oversized bodies and out-of-range coordinates.
    pub fn decode(body: &[u8]) -> Result<Self, ProtocolError> {
        let truncated = |_| ProtocolError::MalformedMessage("truncated body".to_string());
        let mut rdr = Cursor::new(body);

        let id = rdr.read_u16::<LittleEndian>().map_err(truncated)?;
        let kind = MessageKind::from_u16(id).ok_or_else(|| {
            ProtocolError::MalformedMessage(format!("unsupported message category: {id}"))
        })?;

        let payload = if kind == MessageKind::Reset {
            None
        } else {
            let x = rdr.read_i32::<LittleEndian>().map_err(truncated)?;
            let y = rdr.read_i32::<LittleEndian>().map_err(truncated)?;
            Some(GridPair::new(x, y))
        };

        if rdr.position() as usize != body.len() {
            return Err(ProtocolError::MalformedMessage(format!(
                "{} trailing bytes after {kind}",
                body.len() - rdr.position() as usize
            )));
        }

        Self::from_parts(kind, payload)
    }
}

/// Longest frame [`FrameReader`] skips over before giving up on the stream.
pub const MAX_SKIP_LEN: usize = 1 << 20;

/// Splits a byte stream into frame bodies.
///
/// A frame announcing more than [`MAX_BODY_LEN`] bytes is dropped: its
/// bytes are discarded as they arrive and reading resumes at the next
/// frame boundary.
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    input: Vec<u8>,
    // Bytes of a dropped frame still to be discarded.
    skip: usize,
}

impl FrameReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes read from the stream.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.input.extend_from_slice(bytes);
    }

    /// Checks if no partial frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.skip == 0
    }

    /// Removes the next complete frame and returns its body.
    ///
    /// Returns `Ok(None)` until a whole frame has arrived.
    ///
    /// # Errors
    ///
    /// A frame announcing more than [`MAX_SKIP_LEN`] bytes. Nothing that
    /// long is a garbled message; the stream is not speaking this protocol.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        loop {
            if self.skip > 0 {
                let n = self.skip.min(self.input.len());
                self.input.drain(..n);
                self.skip -= n;
                if self.skip > 0 {
                    return Ok(None);
                }
            }

            if self.input.len() < 4 {
                return Ok(None);
            }

            let mut rdr = Cursor::new(&self.input[..4]);
            let body_len = rdr
                .read_u32::<LittleEndian>()
                .map_err(|e| ProtocolError::MalformedMessage(e.to_string()))?
                as usize;

            if body_len > MAX_SKIP_LEN {
                return Err(ProtocolError::MalformedMessage(format!(
                    "frame of {body_len} bytes exceeds {MAX_SKIP_LEN}"
                )));
            }

            if body_len > MAX_BODY_LEN {
                let error = ProtocolError::MalformedMessage(format!(
                    "frame of {body_len} bytes exceeds {MAX_BODY_LEN}"
                ));
                warn!(%error, "Skipping oversized frame");
                self.input.drain(..4);
                self.skip = body_len;
                continue;
            }

            let end = 4 + body_len;
            if self.input.len() < end {
                return Ok(None);
            }

            let body = self.input[4..end].to_vec();
            self.input.drain(..end);
            return Ok(Some(body));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_kind_ids_roundtrip() {
        for kind in MessageKind::iter() {
            assert_eq!(MessageKind::from_u16(kind.as_u16()), Some(kind));
        }
        assert_eq!(MessageKind::from_u16(5), None);
    }

    #[test]
    fn test_grid_pair_roundtrip_all_cells() {
        for x in 0..9 {
            for y in 0..9 {
                let pair = GridPair::new(x, y);
                let coord = pair.to_coordinate().unwrap();
                assert_eq!(GridPair::from_coordinate(coord), pair);
            }
        }
    }

    #[test]
    fn test_grid_pair_flattening() {
        let coord = Coordinate::from_parts(2, 0, 1, 2).unwrap();
        assert_eq!(GridPair::from_coordinate(coord), GridPair::new(7, 2));
    }

    #[test]
    fn test_out_of_range_pairs_rejected() {
        assert!(GridPair::new(9, 0).to_coordinate().is_err());
        assert!(GridPair::new(0, -1).to_coordinate().is_err());
        assert!(GridPair::new(3, 0).to_board().is_err());
        assert!(GridPair::new(2, 2).to_board().is_ok());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let body = [9u8, 0];
        assert!(matches!(
            WireMessage::decode(&body),
            Err(ProtocolError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut body = Vec::new();
        WireMessage::MoveToClient(Coordinate::from_parts(1, 1, 1, 1).unwrap())
            .write_body(&mut body)
            .unwrap();
        body.pop();
        assert!(WireMessage::decode(&body).is_err());
    }

    #[test]
    fn test_out_of_range_board_rejected() {
        let mut body = Vec::new();
        body.write_u16::<LittleEndian>(MessageKind::ActiveBoardToClient.as_u16())
            .unwrap();
        body.write_i32::<LittleEndian>(1).unwrap();
        body.write_i32::<LittleEndian>(3).unwrap();
        assert!(matches!(
            WireMessage::decode(&body),
            Err(ProtocolError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_reader_waits_for_complete_frame() {
        let mut stream = Vec::new();
        WireMessage::Reset.pack(&mut stream).unwrap();
        WireMessage::ActiveBoardFromClient(Position::TopRight)
            .pack(&mut stream)
            .unwrap();

        let mut reader = FrameReader::new();
        reader.extend(&stream[..3]);
        assert_eq!(reader.next_frame(), Ok(None));

        reader.extend(&stream[3..]);
        let first = reader.next_frame().unwrap().unwrap();
        assert_eq!(WireMessage::decode(&first), Ok(WireMessage::Reset));
        let second = reader.next_frame().unwrap().unwrap();
        assert_eq!(
            WireMessage::decode(&second),
            Ok(WireMessage::ActiveBoardFromClient(Position::TopRight))
        );
        assert_eq!(reader.next_frame(), Ok(None));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_oversized_frame_skipped() {
        let mut stream = Vec::new();
        stream.write_u32::<LittleEndian>(100).unwrap();
        stream.extend_from_slice(&[0xAB; 100]);
        WireMessage::MoveFromClient(Coordinate::from_parts(1, 1, 1, 1).unwrap())
            .pack(&mut stream)
            .unwrap();

        let mut reader = FrameReader::new();
        reader.extend(&stream);
        let body = reader.next_frame().unwrap().unwrap();
        assert_eq!(
            WireMessage::decode(&body),
            Ok(WireMessage::MoveFromClient(
                Coordinate::from_parts(1, 1, 1, 1).unwrap()
            ))
        );
        assert!(reader.is_empty());
    }

    #[test]
    fn test_oversized_frame_skipped_across_reads() {
        let mut stream = Vec::new();
        stream.write_u32::<LittleEndian>(3000).unwrap();
        stream.extend_from_slice(&[0x7F; 3000]);
        WireMessage::Reset.pack(&mut stream).unwrap();

        let mut reader = FrameReader::new();
        let mut bodies = Vec::new();
        for chunk in stream.chunks(1024) {
            reader.extend(chunk);
            while let Some(body) = reader.next_frame().unwrap() {
                bodies.push(body);
            }
        }
        assert_eq!(bodies.len(), 1);
        assert_eq!(WireMessage::decode(&bodies[0]), Ok(WireMessage::Reset));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_absurd_frame_length_is_fatal() {
        let mut input = Vec::new();
        input.write_u32::<LittleEndian>(u32::MAX).unwrap();
        let mut reader = FrameReader::new();
        reader.extend(&input);
        assert!(matches!(
            reader.next_frame(),
            Err(ProtocolError::MalformedMessage(_))
        ));
    }
}
