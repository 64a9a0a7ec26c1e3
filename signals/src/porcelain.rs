pub mod subscribe;
#[cfg(feature = "tokio")]
pub mod wait;
