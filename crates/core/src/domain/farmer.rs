use serde::{Deserialize, Serialize};

use super::identity::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarmerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farmer {
    pub id: FarmerId,
    pub user_id: UserId,
    pub farm_name: String,
}
