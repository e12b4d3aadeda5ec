// CLI command implementations
//
// generate/render/validate run the assembler locally; status/download talk to
// a running Paper API.

pub mod download;
pub mod generate;
pub mod render;
pub mod status;
pub mod validate;
