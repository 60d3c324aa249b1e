// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 定义提取请求、提取结果、输出格式及提供方文档结构
pub mod extraction;
