// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求 DTO 及其到领域模型的校验转换
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 提取请求与结果、错误分类、提供方接口和提取服务
pub mod domain;

/// 基础设施模块
///
/// Firecrawl 客户端和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和中间件
pub mod presentation;

/// 工具模块
///
/// URL 安全检查和日志初始化
pub mod utils;
