use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use epaper_drivers::{Epd, EpdError};
use epaper_hal::UartTx;
use epaper_host::{
    supported_baudrates, Error, HostConfig, Result, SerialPort, StreamTx, DEFAULT_CONFIG_PATH,
};
use epaper_protocol::{Color, Command, Font, Frame, MemoryMode, Rotation};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "epaper", about = "Send commands to a UART e-paper display")]
struct Cli {
    /// Config file (default: ./epaper.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serial device; frames go to stdout if neither this nor the config names one
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Line speed of the serial device
    #[arg(short, long, global = true, value_parser = parse_baud)]
    baud: Option<u32>,

    /// Leave the line settings of the device untouched
    #[arg(long, global = true)]
    no_configure: bool,

    /// Print the frame as hex instead of sending it
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Check that the controller is alive
    Handshake,
    /// Change the controller's line speed (takes effect after power cycle)
    SetBaud {
        #[arg(value_parser = parse_baud)]
        baud: u32,
    },
    /// Ask the controller for its line speed
    ReadBaud,
    /// Select where fonts and pictures are loaded from
    Memory {
        /// nand | tf
        #[arg(value_parser = parse_memory)]
        mode: MemoryMode,
    },
    /// Put the controller to sleep
    Stop,
    /// Push the frame buffer to the panel
    Update,
    /// Rotate the display
    Rotate {
        /// normal | inverted
        #[arg(value_parser = parse_rotation)]
        rotation: Rotation,
    },
    /// Copy fonts from the selected storage into NAND
    LoadFont,
    /// Copy pictures from the selected storage into NAND
    LoadPicture,
    /// Set drawing colors (black, dark-gray, gray, white)
    Color {
        #[arg(value_parser = parse_color)]
        foreground: Color,
        #[arg(value_parser = parse_color, default_value = "white")]
        background: Color,
    },
    /// Select the English font size (32, 48 or 64)
    EnFont {
        #[arg(value_parser = parse_font)]
        size: Font,
    },
    /// Select the Chinese font size (32, 48 or 64)
    ChFont {
        #[arg(value_parser = parse_font)]
        size: Font,
    },
    /// Draw a single pixel
    #[command(allow_negative_numbers = true)]
    Pixel { x: i32, y: i32 },
    /// Draw a line
    #[command(allow_negative_numbers = true)]
    Line { x0: i32, y0: i32, x1: i32, y1: i32 },
    /// Fill a rectangle given two corners
    #[command(allow_negative_numbers = true)]
    FillRect { x0: i32, y0: i32, x1: i32, y1: i32 },
    /// Draw a circle outline
    #[command(allow_negative_numbers = true)]
    Circle { x: i32, y: i32, r: i32 },
    /// Draw a filled circle
    #[command(allow_negative_numbers = true)]
    FillCircle { x: i32, y: i32, r: i32 },
    /// Draw a triangle outline
    #[command(allow_negative_numbers = true)]
    Triangle {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    /// Draw a filled triangle
    #[command(allow_negative_numbers = true)]
    FillTriangle {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    /// Clear the screen to the background color
    Clear,
    /// Draw a string
    #[command(allow_negative_numbers = true)]
    Text { x: i32, y: i32, text: String },
    /// Draw one character (a literal character or 0xNN)
    #[command(allow_negative_numbers = true)]
    Char {
        x: i32,
        y: i32,
        #[arg(value_parser = parse_char)]
        ch: u8,
    },
    /// Draw a stored picture by file name (e.g. PIC4.BMP)
    #[command(allow_negative_numbers = true)]
    Bitmap { x: i32, y: i32, name: String },
    /// Parse a hex-encoded frame and print its fields
    Decode {
        /// Frame bytes, e.g. "A5 00 09 2E CC 33 C3 3C 82"
        #[arg(required = true)]
        hex: Vec<String>,
    },
}

fn parse_baud(s: &str) -> std::result::Result<u32, String> {
    let baud: u32 = s.parse().map_err(|e| format!("'{s}': {e}"))?;
    if supported_baudrates().any(|supported| supported == baud) {
        return Ok(baud);
    }
    let list: Vec<String> = supported_baudrates().map(|b| b.to_string()).collect();
    Err(format!("unsupported baud rate {baud} (one of {})", list.join(", ")))
}

fn parse_color(s: &str) -> std::result::Result<Color, String> {
    match s {
        "black" | "0" => Ok(Color::Black),
        "dark-gray" | "darkgray" | "1" => Ok(Color::DarkGray),
        "gray" | "2" => Ok(Color::Gray),
        "white" | "3" => Ok(Color::White),
        other => Err(format!("unknown color '{other}'")),
    }
}

fn parse_font(s: &str) -> std::result::Result<Font, String> {
    match s {
        "32" => Ok(Font::Size32),
        "48" => Ok(Font::Size48),
        "64" => Ok(Font::Size64),
        other => Err(format!("unsupported font size '{other}' (32, 48 or 64)")),
    }
}

fn parse_memory(s: &str) -> std::result::Result<MemoryMode, String> {
    match s {
        "nand" => Ok(MemoryMode::Nand),
        "tf" | "sd" => Ok(MemoryMode::TfCard),
        other => Err(format!("unknown storage '{other}' (nand or tf)")),
    }
}

fn parse_rotation(s: &str) -> std::result::Result<Rotation, String> {
    match s {
        "normal" | "0" => Ok(Rotation::Normal),
        "inverted" | "180" => Ok(Rotation::Inverted),
        other => Err(format!("unknown rotation '{other}' (normal or inverted)")),
    }
}

fn parse_char(s: &str) -> std::result::Result<u8, String> {
    if let [byte] = s.as_bytes() {
        return Ok(*byte);
    }
    s.strip_prefix("0x")
        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        .ok_or_else(|| format!("expected one ASCII character or 0xNN, got '{s}'"))
}

/// Accepts "A5 00 09", "A50009", "a5:00:09" and "0xA5 0x00 0x09"
fn parse_hex(parts: &[String]) -> Result<Vec<u8>> {
    let mut digits = String::new();
    let separator = |c: char| c.is_whitespace() || c == ':' || c == ',';
    for token in parts.iter().flat_map(|p| p.split(separator)) {
        digits.push_str(token.strip_prefix("0x").unwrap_or(token));
    }
    if digits.len() % 2 != 0 {
        return Err(Error::InvalidText("odd number of hex digits".to_string()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| Error::InvalidText(format!("not hex: '{}'", &digits[i..])))
        })
        .collect()
}

fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn warn_if_not_ascii(text: &str) {
    if !text.is_ascii() {
        warn!("'{text}' is not ASCII; the controller expects GB2312, sending UTF-8 bytes as is");
    }
}

fn run<T: UartTx>(epd: &mut Epd<T>, command: &Cmd) -> std::result::Result<(), EpdError<T::Error>> {
    match *command {
        Cmd::Handshake => epd.handshake(),
        Cmd::SetBaud { baud } => epd.set_baud(baud),
        Cmd::ReadBaud => epd.read_baud(),
        Cmd::Memory { mode } => epd.set_memory(mode),
        Cmd::Stop => epd.enter_stop_mode(),
        Cmd::Update => epd.update(),
        Cmd::Rotate { rotation } => epd.set_rotation(rotation),
        Cmd::LoadFont => epd.load_font(),
        Cmd::LoadPicture => epd.load_picture(),
        Cmd::Color {
            foreground,
            background,
        } => epd.set_color(foreground, background),
        Cmd::EnFont { size } => epd.set_en_font(size),
        Cmd::ChFont { size } => epd.set_ch_font(size),
        Cmd::Pixel { x, y } => epd.draw_pixel(x, y),
        Cmd::Line { x0, y0, x1, y1 } => epd.draw_line(x0, y0, x1, y1),
        Cmd::FillRect { x0, y0, x1, y1 } => epd.fill_rect(x0, y0, x1, y1),
        Cmd::Circle { x, y, r } => epd.draw_circle(x, y, r),
        Cmd::FillCircle { x, y, r } => epd.fill_circle(x, y, r),
        Cmd::Triangle {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
        } => epd.draw_triangle(x0, y0, x1, y1, x2, y2),
        Cmd::FillTriangle {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
        } => epd.fill_triangle(x0, y0, x1, y1, x2, y2),
        Cmd::Clear => epd.clear(),
        Cmd::Text { x, y, ref text } => {
            warn_if_not_ascii(text);
            epd.draw_string(x, y, text)
        }
        Cmd::Char { x, y, ch } => epd.draw_char(x, y, ch),
        Cmd::Bitmap { x, y, ref name } => {
            warn_if_not_ascii(name);
            epd.draw_bitmap(x, y, name)
        }
        // Handled before a transport is opened
        Cmd::Decode { .. } => Ok(()),
    }
}

fn send<T: UartTx<Error = io::Error>>(tx: T, command: &Cmd) -> Result<()> {
    let mut epd = Epd::new(tx);
    run(&mut epd, command)?;
    epd.flush()?;
    Ok(())
}

fn decode(hex: &[String]) -> Result<()> {
    let bytes = parse_hex(hex)?;
    let frame = Frame::from_bytes(&bytes)?;

    match frame.opcode() {
        Some(opcode) => println!("opcode:   0x{:02X} ({opcode:?})", frame.opcode_byte()),
        None => println!("opcode:   0x{:02X} (unknown)", frame.opcode_byte()),
    }
    println!("length:   {}", frame.len());
    println!("payload:  {}", hex_string(frame.payload()));
    println!("checksum: 0x{:02X}", frame.checksum());

    match Command::from_frame(&frame) {
        Ok(Command::DrawString { x, y, text }) => {
            println!("command:  DrawString at ({x}, {y}): {:?}", String::from_utf8_lossy(text));
        }
        Ok(Command::DrawBitmap { x, y, name }) => {
            println!("command:  DrawBitmap at ({x}, {y}): {:?}", String::from_utf8_lossy(name));
        }
        Ok(command) => println!("command:  {command:?}"),
        Err(e) => println!("command:  not understood ({e})"),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<HostConfig> {
    match path {
        Some(path) => HostConfig::load(path),
        None => HostConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

fn execute(cli: &Cli, config: &HostConfig) -> Result<()> {
    if let Cmd::Decode { hex } = &cli.command {
        return decode(hex);
    }

    if cli.dry_run {
        let mut tx = StreamTx::new(Vec::new());
        send(&mut tx, &cli.command)?;
        println!("{}", hex_string(tx.get_ref()));
        return Ok(());
    }

    match &config.serial.device {
        Some(path) => {
            let mut port = SerialPort::open(path)?;
            if config.serial.configure {
                port.configure(&config.uart_config())?;
            }
            send(&mut port, &cli.command)?;
            port.close()
        }
        None => {
            info!("No device configured, writing frames to stdout");
            send(StreamTx::stdout()?, &cli.command)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let default_level = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Some(device) = &cli.device {
        config.serial.device = Some(device.clone());
    }
    if let Some(baud) = cli.baud {
        config.serial.baudrate = baud;
    }
    if cli.no_configure {
        config.serial.configure = false;
    }

    if let Err(e) = execute(&cli, &config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["epaper", "pixel", "-5", "10"]).unwrap();
        assert!(matches!(cli.command, Cmd::Pixel { x: -5, y: 10 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["epaper", "clear", "--dry-run", "--baud", "9600"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.baud, Some(9600));
    }

    #[test]
    fn test_baud_argument_validated() {
        let cli = Cli::try_parse_from(["epaper", "set-baud", "9600", "-b", "57600"]).unwrap();
        assert!(matches!(cli.command, Cmd::SetBaud { baud: 9600 }));
        assert_eq!(cli.baud, Some(57_600));

        assert!(Cli::try_parse_from(["epaper", "set-baud", "250000"]).is_err());
        assert!(Cli::try_parse_from(["epaper", "clear", "--baud", "12345"]).is_err());
        assert!(parse_baud("fast").is_err());
    }

    #[test]
    fn test_color_background_defaults_to_white() {
        let cli = Cli::try_parse_from(["epaper", "color", "black"]).unwrap();
        assert!(matches!(
            cli.command,
            Cmd::Color {
                foreground: Color::Black,
                background: Color::White
            }
        ));
    }

    #[test]
    fn test_parse_char() {
        assert_eq!(parse_char("A"), Ok(b'A'));
        assert_eq!(parse_char("0x41"), Ok(0x41));
        assert!(parse_char("AB").is_err());
        assert!(parse_char("0xZZ").is_err());
    }

    #[test]
    fn test_parse_hex_formats() {
        let expected = vec![0xA5, 0x00, 0x09];
        assert_eq!(parse_hex(&["A5 00 09".to_string()]).unwrap(), expected);
        assert_eq!(parse_hex(&["a50009".to_string()]).unwrap(), expected);
        assert_eq!(parse_hex(&["a5:00:09".to_string()]).unwrap(), expected);
        assert_eq!(
            parse_hex(&["0xA5".to_string(), "0x00".to_string(), "0x09".to_string()]).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex(&["A5 0".to_string()]), Err(Error::InvalidText(_))));
        assert!(matches!(parse_hex(&["G5".to_string()]), Err(Error::InvalidText(_))));
    }

    #[test]
    fn test_dry_run_frames() {
        let mut tx = StreamTx::new(Vec::new());
        send(&mut tx, &Cmd::Clear).unwrap();
        assert_eq!(hex_string(tx.get_ref()), "A5 00 09 2E CC 33 C3 3C 82");

        let mut tx = StreamTx::new(Vec::new());
        send(&mut tx, &Cmd::Char { x: 10, y: 20, ch: b'A' }).unwrap();
        assert_eq!(tx.get_ref().len(), 15);
    }

    #[test]
    fn test_too_long_text_maps_to_payload_error() {
        let mut tx = StreamTx::new(Vec::new());
        let text = "x".repeat(600);
        let result = send(&mut tx, &Cmd::Text { x: 0, y: 0, text });
        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
        assert!(tx.get_ref().is_empty());
    }
}
