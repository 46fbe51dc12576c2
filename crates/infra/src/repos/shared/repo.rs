#[derive(Debug, Clone, Copy)]
pub struct DeleteResult {
    pub deleted_count: i64,
}
