use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Acknowledgement body for operations that return no resource.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn success() -> Self {
        Self { success: true }
    }
}
