//! CyberSensei AI service: a thin HTTP layer in front of a llama.cpp
//! server. Each chat request is augmented with snippets from a static
//! cybersecurity knowledge base, formatted as a Mistral instruct prompt,
//! forwarded for completion, and decoded back into structured JSON.

pub mod config;
pub mod decode;
pub mod knowledge;
pub mod llama;
pub mod prompt;
pub mod web;
