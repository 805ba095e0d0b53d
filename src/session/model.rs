use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id (student id for students)
    pub role: String,
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}
