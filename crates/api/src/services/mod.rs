// Services layer for business logic
// Services own generation and publishing; route handlers only translate HTTP

pub mod paper;

pub use paper::{PaperFormat, PaperService};
