/// State management module
///
/// This module handles all application state, including:
/// - User-selected restoration options (options.rs)
/// - The session state machine: loaded photo, outstanding request,
///   restored result, generation tokens (session.rs)

pub mod options;
pub mod session;
