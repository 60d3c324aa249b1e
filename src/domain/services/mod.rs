// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 提取服务（extraction_service）：校验后的请求 → 单次提供方调用 → 规范化结果或分类错误
pub mod extraction_service;
