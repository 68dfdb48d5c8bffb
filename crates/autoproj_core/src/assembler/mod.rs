//! Timeline assembly.
//!
//! Every sequence starts from its source video. The start slide is inserted
//! at 0 with [`InsertPosition::Before`], which first pushes everything on
//! every track forward by the slide's duration. The end slide goes to the
//! current end of the sequence with [`InsertPosition::End`].

mod errors;
mod position;
mod sequence;

pub use errors::AssembleError;
pub use position::{InsertPosition, InvalidPosition};
pub use sequence::{clip_name, find_clip_by_name, BuiltSequence, TimelineAssembler};
