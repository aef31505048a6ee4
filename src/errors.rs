use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmError<E> {
    #[error("brightness {0} is out of range (0 to 7)")]
    Brightness(u8),

    #[error("display position {0} is out of range (0 to 5)")]
    Position(u8),

    #[error("a line IO error occured")]
    Line(E),
}

impl<E> From<E> for TmError<E> {
    fn from(err: E) -> Self {
        Self::Line(err)
    }
}
