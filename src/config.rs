//! Command line and environment configuration.

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Single JSON document on disk
    Json,
    /// In-process only, lost on exit
    Memory,
}

/// Habit tracker HTTP service
#[derive(Parser, Debug, Clone)]
#[command(name = "habit_tracker")]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Path of the JSON data file (json store only)
    #[arg(long, env = "APP_DATA_PATH", default_value = "data/state.json")]
    pub data_path: PathBuf,

    /// Storage backend
    #[arg(long, env = "APP_STORE", value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,
}

impl Args {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
