/// 健康检查
pub mod health;
/// 二维码生成、查询与列表
pub mod qr;
