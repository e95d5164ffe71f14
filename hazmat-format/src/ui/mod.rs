//! The terminal output of hazmat.

pub use termcolor::WriteColor;
use termcolor::{Color, ColorSpec};

pub use reporter::{should_print, Reporter};

mod reporter;

lazy_static! {
    /// Whether the terminal supports ANSI 256 colors.
    static ref HAS_256: bool = {
        if std::env::var("HAZMAT_ANSI256").as_deref() == Ok("true") {
            if let Some(support) = supports_color::on(supports_color::Stream::Stdout) {
                support.has_256
            } else {
                false
            }
        } else {
            false
        }
    };
    /// The RED color to use with `cwrite!` and `cwriteln!`
    pub static ref RED: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(if *HAS_256 { Color::Ansi256(196) } else { Color::Red }))
            .set_intense(true)
            .set_bold(true);
        color
    };
    /// The GREEN color to use with `cwrite!` and `cwriteln!`
    pub static ref GREEN: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(if *HAS_256 { Color::Ansi256(118) } else { Color::Green }))
            .set_intense(true)
            .set_bold(true);
        color
    };
    /// The YELLOW color to use with `cwrite!` and `cwriteln!`
    pub static ref YELLOW: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(if *HAS_256 { Color::Ansi256(226) } else { Color::Yellow }))
            .set_intense(true)
            .set_bold(true);
        color
    };
    /// The BLUE color to use with `cwrite!` and `cwriteln!`
    pub static ref BLUE: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(if *HAS_256 { Color::Ansi256(33) } else { Color::Blue }))
            .set_intense(true)
            .set_bold(true);
        color
    };
    /// The bold style to use with `cwrite!` and `cwriteln!`
    pub static ref BOLD: ColorSpec = {
        let mut color = ColorSpec::new();
        color.set_bold(true);
        color
    };
}

/// Write to `$self.stream`, in the color specified as second parameter. The arguments that follow
/// will be passed to `write!`.
///
/// ```
/// use termcolor::{Buffer, ColorSpec};
/// use hazmat_format::cwrite;
///
/// struct Printer {
///     stream: Buffer,
/// }
///
/// let mut color = ColorSpec::new();
/// color.set_bold(true);
///
/// let mut printer = Printer { stream: Buffer::no_color() };
/// cwrite!(printer, color, "The output is {}", 42);
/// assert_eq!(printer.stream.as_slice(), b"The output is 42");
/// ```
#[macro_export]
macro_rules! cwrite {
    ($self:expr, $color:expr, $($arg:tt)*) => {{
        use std::io::Write;
        use $crate::ui::WriteColor;
        $self.stream.set_color(&$color).unwrap();
        write!(&mut $self.stream, $($arg)*).unwrap();
        $self.stream.reset().unwrap();
    }};
}

/// Write to `$self.stream`, in the color specified as second parameter. The arguments that follow
/// will be passed to `writeln!`.
#[macro_export]
macro_rules! cwriteln {
    ($self:expr, $color:expr, $($arg:tt)*) => {{
        use std::io::Write;
        use $crate::ui::WriteColor;
        $self.stream.set_color(&$color).unwrap();
        writeln!(&mut $self.stream, $($arg)*).unwrap();
        $self.stream.reset().unwrap();
    }};
}
