#[cfg(windows)]
mod shadows;
#[cfg(windows)]
mod volumes;
#[cfg(windows)]
pub use shadows::VssProvider;

#[cfg(not(windows))]
mod shadows_stub;
#[cfg(not(windows))]
pub use shadows_stub::VssProvider;
