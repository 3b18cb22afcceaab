// ==========================================
// 选矿厂运营系统 - 磨矿提交仓储
// ==========================================
// 红线: 一次提交 = 一个事务
// 事务内: 复核库存与磨机状态 -> 写登记 -> 扣库存 -> 占用磨机
// 任一步失败整体回滚，不存在部分提交
// ==========================================

mod core;


pub use core::SubmissionRepository;
