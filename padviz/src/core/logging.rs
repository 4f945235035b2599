use std::io::Write;

use env_logger::{Builder, Env};
use log::Record;
use termcolor::{
    Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor,
};

pub use log::{debug, error, info, trace, warn};

/// Colored stderr logger filtered to `padviz=info` unless `RUST_LOG` says
/// otherwise
pub fn init_logger() {
    init_logger_verbose(false);
}

/// Like [`init_logger`], with `verbose` lowering the default filter to
/// `padviz=debug` so profile selection and skipped frames are traced
pub fn init_logger_verbose(verbose: bool) {
    let filter = if verbose { "padviz=debug" } else { "padviz=info" };
    let mut builder =
        Builder::from_env(Env::default().default_filter_or(filter));

    builder.format(|_buf, record| {
        let writer = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = writer.buffer();
        write_record(&mut buffer, record)?;
        writer.print(&buffer)
    });

    let _ = builder.try_init();
}

fn write_record(buffer: &mut Buffer, record: &Record) -> std::io::Result<()> {
    let color = match record.level() {
        log::Level::Trace => Color::Cyan,
        log::Level::Debug => Color::Blue,
        log::Level::Info => Color::Green,
        log::Level::Warn => Color::Yellow,
        log::Level::Error => Color::Red,
    };
    buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(buffer, "{:<5}", record.level())?;
    buffer.reset()?;

    let module = record.module_path().unwrap_or("padviz");
    let module = module.strip_prefix("padviz::").unwrap_or(module);
    writeln!(buffer, " {}: {}", module, record.args())
}
