/// Photo restoration module
///
/// This module handles:
/// - Building the instruction prompt from the selected options
/// - Encoding photos for transport and decoding/exporting results
/// - The remote call to the generative image service

pub mod client;
pub mod codec;
pub mod prompt;
