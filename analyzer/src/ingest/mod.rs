pub mod reference;
pub mod trace;

pub use reference::load_reference;
pub use trace::load_trace;
