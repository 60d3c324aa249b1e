// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 错误分类（errors）：面向调用方的错误类型及提供方错误映射
/// - 领域模型（models）：提取请求、结果和输出格式
/// - 抓取客户端（scrape_client）：外部提取提供方的抽象接口
/// - 服务（services）：提取调用封装
///
/// 领域层不依赖任何具体的提供方实现。
pub mod errors;
pub mod models;
pub mod scrape_client;
pub mod services;
