use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use log::LevelFilter;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

/// Sends log output to `output_path`. Without a call to this, log messages are discarded, since
/// stdout belongs to the program's actual output.
pub(crate) fn init(output_path: &Path, level: LevelFilter) -> Result<()> {
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to write log file `{}`", output_path.display()))?;
    log::set_boxed_logger(Box::new(FileLogger {
        file: Mutex::new(file),
        start: Instant::now(),
        level,
    }))
    .map_err(|_| anyhow!("Failed to set logger"))?;
    log::set_max_level(level);
    Ok(())
}

struct FileLogger {
    file: Mutex<std::fs::File>,
    start: Instant,
    level: LevelFilter,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // If a write to our log file fails, there's not a lot we can do, so we just ignore it.
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let _ = writeln!(
            file,
            "{:0.3}: {} {} - {}",
            self.start.elapsed().as_secs_f32(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}
