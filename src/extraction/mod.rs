//! Text Extraction Module
//!
//! Turns uploaded documents and remote URLs into plain text through an Apache Tika
//! server (`PUT /rmeta/text`).
//!
//! A document without extractable text yields an empty string. A timeout and an
//! unusable response are reported as two different errors so callers can tell
//! "no text found" apart from "could not ask".

pub mod tika;
