pub mod common;
pub mod config;

pub mod aggregation {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod index {
    pub mod entity;
    pub mod error;
}

pub mod feed {
    pub mod error;
    pub mod port;
}

pub mod report {
    pub mod entity;
    pub mod error;
    pub mod port;
}

#[cfg(feature = "test-utils")]
pub mod testing;
