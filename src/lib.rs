// DanceAI Server Library
// Choreography generator, preferences, history and playback services

pub mod commands;
pub mod models;
pub mod services;
