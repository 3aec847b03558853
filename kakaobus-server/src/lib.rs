//! KakaoMap bus arrival server.
//!
//! Polls the KakaoMap bus stop endpoint for configured stops and publishes
//! one "minutes until next bus" sensor per selected route. Stops are added
//! and tuned through config and options flows served over a JSON API.

pub mod config;
pub mod consts;
pub mod coordinator;
pub mod domain;
pub mod flow;
pub mod host;
pub mod kakao;
pub mod sensor;
pub mod web;
