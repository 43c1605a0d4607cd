use crate::surface::Surface;
use std::fmt;

#[derive(Debug)]
pub struct DisplayError(pub String);

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display error: {}", self.0)
    }
}

impl std::error::Error for DisplayError {}

/// Where rendered surfaces end up.
pub trait Display {
    /// False once the user has closed the output.
    fn is_open(&self) -> bool;

    /// Process pending window events; called once per tick.
    fn pump(&mut self);

    fn present(&mut self, surface: &Surface) -> Result<(), DisplayError>;
}
