// ==========================================
// 测试数据构建器
// ==========================================

use mill_ops::api::ClientInput;
use mill_ops::domain::allocation::AllocationCommand;
use mill_ops::domain::types::{DurationBucket, MineralCategory, OreSubtype};

/// 客户录入构建器
pub struct ClientInputBuilder {
    input: ClientInput,
}

impl ClientInputBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            input: ClientInput {
                name: name.to_string(),
                document_id: None,
                phone: None,
                mineral_category: MineralCategory::A,
            },
        }
    }

    pub fn category(mut self, category: MineralCategory) -> Self {
        self.input.mineral_category = category;
        self
    }

    pub fn document_id(mut self, document_id: &str) -> Self {
        self.input.document_id = Some(document_id.to_string());
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.input.phone = Some(phone.to_string());
        self
    }

    pub fn build(self) -> ClientInput {
        self.input
    }
}

// ==========================================
// 分配命令快捷构造
// ==========================================

pub fn bucket(bucket: DurationBucket) -> AllocationCommand {
    AllocationCommand::SetBucket {
        bucket,
        selected: true,
    }
}

pub fn coarse(mill_id: &str, quantity: u32) -> AllocationCommand {
    AllocationCommand::SetQuantity {
        mill_id: mill_id.to_string(),
        subtype: OreSubtype::Coarse,
        quantity,
    }
}

pub fn fine(mill_id: &str, quantity: u32) -> AllocationCommand {
    AllocationCommand::SetQuantity {
        mill_id: mill_id.to_string(),
        subtype: OreSubtype::Fine,
        quantity,
    }
}
