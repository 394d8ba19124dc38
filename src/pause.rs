use console::Term;

/// Abstraction over waiting for a single key press.
///
/// Decouples pause-on-exit from the terminal so it can be mocked in tests.
pub trait KeyWaiter {
    /// Show `prompt` and block until a key is pressed.
    ///
    /// # Returns
    /// `Ok(())` once a key was read, or `Err(String)` if the terminal could not be read.
    fn wait(&mut self, prompt: &str) -> Result<(), String>;
}

/// Default implementation of `KeyWaiter` using `console::Term`.
pub struct ConsoleKeyWaiter;

impl KeyWaiter for ConsoleKeyWaiter {
    fn wait(&mut self, prompt: &str) -> Result<(), String> {
        let term = Term::stdout();
        term.write_str(prompt).map_err(|e| e.to_string())?;
        term.read_key().map_err(|e| e.to_string())?;
        term.write_line("").map_err(|e| e.to_string())?;
        term.write_line("").map_err(|e| e.to_string())
    }
}

/// Waits for a key when `enabled`.
///
/// # Parameters
/// - `waiter`: A mutable reference to a `KeyWaiter` implementation.
/// - `enabled`: The resolved pause option.
pub fn pause_if<W: KeyWaiter>(waiter: &mut W, enabled: bool) -> Result<(), String> {
    if !enabled {
        return Ok(());
    }
    waiter.wait("Press any key to continue: ")
}
