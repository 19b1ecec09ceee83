use crate::foundation::error::SlidecastResult;

/// External video encoder with a private staging area.
///
/// File names are flat (no directories). Implementations are used from one thread at a time.
pub trait EncoderEngine: Send {
    /// Return `true` once [`EncoderEngine::load`] has succeeded.
    fn is_loaded(&self) -> bool;
    /// One-time asset load / initialization.
    fn load(&mut self) -> SlidecastResult<()>;
    /// Create or replace `name` in the staging area.
    fn write_file(&mut self, name: &str, bytes: &[u8]) -> SlidecastResult<()>;
    /// Read `name` back from the staging area.
    fn read_file(&mut self, name: &str) -> SlidecastResult<Vec<u8>>;
    /// Delete `name` from the staging area.
    fn remove_file(&mut self, name: &str) -> SlidecastResult<()>;
    /// Run the encoder with `args`; relative names resolve inside the staging area.
    fn run(&mut self, args: &[String]) -> SlidecastResult<()>;
}

impl<E: EncoderEngine + ?Sized> EncoderEngine for Box<E> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn load(&mut self) -> SlidecastResult<()> {
        (**self).load()
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> SlidecastResult<()> {
        (**self).write_file(name, bytes)
    }

    fn read_file(&mut self, name: &str) -> SlidecastResult<Vec<u8>> {
        (**self).read_file(name)
    }

    fn remove_file(&mut self, name: &str) -> SlidecastResult<()> {
        (**self).remove_file(name)
    }

    fn run(&mut self, args: &[String]) -> SlidecastResult<()> {
        (**self).run(args)
    }
}

/// Check that `name` is a plain file name inside the staging area.
pub(crate) fn validate_staged_name(name: &str) -> SlidecastResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(crate::foundation::error::SlidecastError::encode(format!(
            "invalid staging file name '{name}'"
        )));
    }
    Ok(())
}
