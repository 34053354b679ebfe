use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

/// A hosted checkout page opened outside the application.
///
/// The only observable signal is whether the window has been closed; a
/// closed window says nothing about whether the payment went through.
pub trait HostedWindow: Send + Sync {
    fn is_closed(&self) -> bool;

    /// Best-effort close when the application abandons the session.
    fn close(&self) {}
}

pub trait CheckoutLauncher: Send + Sync + 'static {
    /// Opens `url`. `None` means the window could not be opened (a blocked
    /// popup in a browser).
    fn open(&self, url: &str) -> Option<Box<dyn HostedWindow>>;
}

type LineSource = Box<dyn BufRead + Send>;

/// Prints the checkout URL and treats the session as closed once the user
/// presses Enter (or input ends).
///
/// One detached reader thread serves every window. It is started on the first
/// `open` and never holds up runtime shutdown.
pub struct TerminalLauncher {
    input: Arc<TerminalInput>,
}

struct TerminalInput {
    source: Mutex<Option<LineSource>>,
    waiting: Mutex<Option<Arc<AtomicBool>>>,
    ended: AtomicBool,
}

impl TerminalInput {
    /// Marks the window currently waiting for Enter as closed.
    fn release(&self) {
        if let Ok(mut waiting) = self.waiting.lock() {
            if let Some(closed) = waiting.take() {
                closed.store(true, Ordering::SeqCst);
            }
        }
    }

    fn read_lines(&self, mut source: LineSource) {
        let mut line = String::new();
        loop {
            line.clear();
            match source.read_line(&mut line) {
                Ok(0) => {
                    debug!("Terminal input ended");
                    break;
                }
                Ok(_) => self.release(),
                Err(e) => {
                    warn!(error = %e, "Could not read terminal input");
                    break;
                }
            }
        }
        self.ended.store(true, Ordering::SeqCst);
        self.release();
    }
}

impl TerminalLauncher {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            input: Arc::new(TerminalInput {
                source: Mutex::new(Some(Box::new(reader))),
                waiting: Mutex::new(None),
                ended: AtomicBool::new(false),
            }),
        }
    }

    fn start_reader(&self) {
        let source = match self.input.source.lock() {
            Ok(mut source) => source.take(),
            Err(_) => None,
        };
        let Some(source) = source else { return };

        let input = self.input.clone();
        let spawned = thread::Builder::new()
            .name("checkout-input".to_string())
            .spawn(move || input.read_lines(source));
        if let Err(e) = spawned {
            warn!(error = %e, "Could not start the terminal reader");
            self.input.ended.store(true, Ordering::SeqCst);
            self.input.release();
        }
    }
}

impl std::fmt::Debug for TerminalLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalLauncher")
            .field("ended", &self.input.ended.load(Ordering::SeqCst))
            .finish()
    }
}

struct TerminalWindow {
    closed: Arc<AtomicBool>,
}

impl HostedWindow for TerminalWindow {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl CheckoutLauncher for TerminalLauncher {
    fn open(&self, url: &str) -> Option<Box<dyn HostedWindow>> {
        info!(url, "Complete the payment in your browser, then press Enter");

        let closed = Arc::new(AtomicBool::new(self.input.ended.load(Ordering::SeqCst)));
        if let Ok(mut waiting) = self.input.waiting.lock() {
            *waiting = Some(closed.clone());
        }
        // Input may have ended between the load above and registering.
        if self.input.ended.load(Ordering::SeqCst) {
            self.input.release();
        }
        self.start_reader();

        Some(Box::new(TerminalWindow { closed }))
    }
}
