//! # Error Types
//!
//! This module defines all error types for the hover preview.
//!
//! None of these errors ever reach the page as an alert. They either explain why a hover
//! produced no tooltip (logged by the host) or, for render failures, provide the text shown
//! inside the tooltip body.
//!
//! ## Error Types
//! - `NotFound` - The article text holds no complete notation block
//! - `FetchFailure` - The article could not be retrieved or decoded
//! - `RenderFailure` / `RendererUnavailable` - The score renderer could not draw the block
//! - `RaceStale` - A result arrived for a hover the user already left
//! - `ConfigError` - Invalid configuration values
//!
//! ## Usage
//! ```rust
//! use abc_hover::{find_block, HoverError, MissingPiece};
//!
//! match find_block("T:Untitled\nK:C\nCDEF|") {
//!     Ok(block) => println!("{}", block),
//!     Err(HoverError::NotFound(MissingPiece::StartMarker)) => println!("no X: field"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Which part of a notation block could not be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPiece {
    /// No line starting with `X:`
    StartMarker,
    /// No `K:` line at or after the start marker
    KeyMarker,
    /// Nothing but blank lines and header fields after the `K:` line
    ContentLine,
}

impl fmt::Display for MissingPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPiece::StartMarker => write!(f, "no X: field"),
            MissingPiece::KeyMarker => write!(f, "no K: field after X:"),
            MissingPiece::ContentLine => write!(f, "no music line after K:"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoverError {
    /// No notation block in the article text.
    ///
    /// # Example
    /// ```
    /// # use abc_hover::{HoverError, MissingPiece};
    /// let err = HoverError::NotFound(MissingPiece::KeyMarker);
    /// assert_eq!(err.to_string(), "No notation block found: no K: field after X:");
    /// ```
    #[error("No notation block found: {0}")]
    NotFound(MissingPiece),

    /// The article content could not be retrieved or decoded.
    ///
    /// Treated exactly like `NotFound` by the controller.
    #[error("Failed to fetch '{title}': {message}")]
    FetchFailure { title: String, message: String },

    /// The renderer rejected otherwise valid notation.
    #[error("Error rendering ABC notation: {0}")]
    RenderFailure(String),

    /// No renderer is loaded on the page.
    #[error("abcjs is not available")]
    RendererUnavailable,

    /// A delayed show or fetch completed after the user moved on.
    ///
    /// # Example
    /// ```
    /// # use abc_hover::HoverError;
    /// let err = HoverError::RaceStale { link: 3 };
    /// assert_eq!(err.to_string(), "Discarded stale result for link 3");
    /// ```
    #[error("Discarded stale result for link {link}")]
    RaceStale { link: u32 },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl HoverError {
    /// Text displayed inside the tooltip when rendering fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            HoverError::RendererUnavailable => "abcjs is not available.",
            _ => "Error rendering ABC notation.",
        }
    }

    /// Whether the error means "show nothing" rather than degraded tooltip content.
    pub fn is_silent(&self) -> bool {
        !matches!(
            self,
            HoverError::RenderFailure(_) | HoverError::RendererUnavailable
        )
    }
}
