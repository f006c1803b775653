//! Property tests for frame length and checksum invariants.

use epaper_protocol::{
    checksum, Color, Command, Frame, FrameError, FrameParser, Opcode, FRAME_TRAILER,
    MAX_FRAME_SIZE, MAX_TEXT_LEN,
};
use proptest::prelude::*;

/// Length field, actual size, trailer and checksum all agree
fn assert_well_formed(frame: &Frame) {
    let bytes = frame.as_bytes();
    let n = bytes.len();
    assert_eq!(bytes[0], 0xA5);
    assert_eq!(u16::from_be_bytes([bytes[1], bytes[2]]) as usize, n);
    assert_eq!(&bytes[n - 5..n - 1], &FRAME_TRAILER);
    assert_eq!(bytes[n - 1], checksum(&bytes[..n - 1]));
}

fn any_color() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::Black),
        Just(Color::DarkGray),
        Just(Color::Gray),
        Just(Color::White),
    ]
}

proptest! {
    #[test]
    fn shapes_are_well_formed(
        x0 in any::<i32>(), y0 in any::<i32>(),
        x1 in any::<i32>(), y1 in any::<i32>(),
        x2 in any::<i32>(), y2 in any::<i32>(),
    ) {
        let commands = [
            Command::DrawPixel { x: x0, y: y0 },
            Command::DrawLine { x0, y0, x1, y1 },
            Command::FillRect { x0, y0, x1, y1 },
            Command::DrawCircle { x0, y0, r: x1 },
            Command::FillCircle { x0, y0, r: x1 },
            Command::DrawTriangle { x0, y0, x1, y1, x2, y2 },
            Command::FillTriangle { x0, y0, x1, y1, x2, y2 },
        ];
        for command in commands {
            let frame = command.to_frame().unwrap();
            assert_well_formed(&frame);
            prop_assert_eq!(frame.len(), 9 + command.payload_len());
            prop_assert_eq!(frame.opcode(), Some(command.opcode()));
        }
    }

    #[test]
    fn coordinates_keep_low_16_bits(x in any::<i32>(), y in any::<i32>()) {
        let frame = Command::DrawPixel { x, y }.to_frame().unwrap();
        let payload = frame.payload();
        prop_assert_eq!(u16::from_be_bytes([payload[0], payload[1]]), x as u16);
        prop_assert_eq!(u16::from_be_bytes([payload[2], payload[3]]), y as u16);
    }

    #[test]
    fn colors_are_well_formed(fg in any_color(), bg in any_color()) {
        let frame = Command::SetColor { foreground: fg, background: bg }.to_frame().unwrap();
        assert_well_formed(&frame);
        prop_assert_eq!(frame.payload(), &[fg.to_byte(), bg.to_byte()][..]);
    }

    #[test]
    fn text_frames_are_well_formed(
        text in proptest::collection::vec(1u8..=255, 0..=MAX_TEXT_LEN),
        x in any::<i16>(),
        y in any::<i16>(),
    ) {
        let command = Command::DrawString { x: x as i32, y: y as i32, text: &text };
        let frame = command.to_frame().unwrap();
        assert_well_formed(&frame);
        prop_assert_eq!(frame.len(), text.len() + 14);
        prop_assert!(frame.len() <= MAX_FRAME_SIZE);
        prop_assert_eq!(*frame.payload().last().unwrap(), 0);

        let decoded = Command::from_frame(&frame).unwrap();
        prop_assert_eq!(decoded, command);
    }

    #[test]
    fn oversized_text_is_rejected(extra in 1usize..64) {
        let text = vec![b'a'; MAX_TEXT_LEN + extra];
        let result = Command::DrawBitmap { x: 0, y: 0, name: &text }.to_frame();
        prop_assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn parser_recovers_every_frame(
        garbage in proptest::collection::vec(
            any::<u8>().prop_filter("no marker", |b| *b != 0xA5),
            0..16,
        ),
        stray_marker in any::<bool>(),
        opcode_index in 0usize..Opcode::ALL.len(),
        payload in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let frame = Frame::new(Opcode::ALL[opcode_index], &payload).unwrap();

        let mut stream = garbage.clone();
        if stray_marker {
            stream.push(0xA5);
        }
        stream.extend_from_slice(frame.as_bytes());

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&stream).unwrap().unwrap();
        prop_assert_eq!(parsed.opcode_byte(), frame.opcode_byte());
        prop_assert_eq!(parsed.payload(), &payload[..]);
    }
}

#[test]
fn every_empty_command_is_nine_bytes() {
    for command in [
        Command::Handshake,
        Command::ReadBaud,
        Command::StopMode,
        Command::Update,
        Command::LoadFont,
        Command::LoadPicture,
        Command::Clear,
    ] {
        let frame = command.to_frame().unwrap();
        assert_well_formed(&frame);
        assert_eq!(frame.len(), 9);
    }
}
