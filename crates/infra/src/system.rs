use chrono::{DateTime, Utc};

/// Clock seam so usecases can be tested against a fixed point in time.
pub trait ISys: Send + Sync {
    fn get_utc_now(&self) -> DateTime<Utc>;
}

pub struct RealSys;

impl ISys for RealSys {
    fn get_utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
