//! NotaDez - 成绩管理平台后端服务
//!
//! 基于 Actix Web 构建：机构、课程、学科、班级、学生，以及按公式计算的最终成绩。
//!
//! # 架构
//! - `cache`: 缓存层（Moka）
//! - `config`: 配置管理
//! - `email`: 邮件发送（密码重置）
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `formula`: 成绩公式解析与求值
//! - `middlewares`: 认证中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod email;
pub mod entity;
pub mod errors;
pub mod formula;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
