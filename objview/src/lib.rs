#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
mod bitwise;

#[allow(clippy::missing_panics_doc)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::cast_possible_truncation)]
pub mod video;
