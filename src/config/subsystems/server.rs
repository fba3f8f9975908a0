// src/config/subsystems/server.rs

use std::net::SocketAddr;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Value of the Access-Control-Allow-Origin header
    pub allow_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8000).into(),
            max_body_bytes: 16 * 1024 * 1024, // 16MB
            allow_origin: "*".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_body_bytes == 0 {
            return Err(Error::Config("max_body_bytes must be greater than 0".to_string()));
        }
        if self.allow_origin.is_empty() {
            return Err(Error::Config("allow_origin must not be empty".to_string()));
        }
        Ok(())
    }
}

impl FromIni for ServerConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "server" {
            return None;
        }
        let value = value.trim_matches('"');

        match key {
            "listen_addr" => match value.parse() {
                Ok(addr) => {
                    self.listen_addr = addr;
                    Some(Ok(()))
                },
                Err(_) => Some(Err(Error::Config(format!("Invalid listen_addr: {}", value)))),
            },
            "max_body_bytes" => match value.parse() {
                Ok(bytes) => {
                    self.max_body_bytes = bytes;
                    Some(Ok(()))
                },
                Err(_) => Some(Err(Error::Config(format!("Invalid max_body_bytes: {}", value)))),
            },
            "allow_origin" => {
                self.allow_origin = value.to_string();
                Some(Ok(()))
            },
            _ => None,
        }
    }
}
