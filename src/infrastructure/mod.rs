// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供对外部系统的具体实现：
/// - Firecrawl 客户端（firecrawl_client）：领域层 `ScrapeClient` 的 HTTP 实现
/// - 指标（metrics）：Prometheus 指标导出
pub mod firecrawl_client;
pub mod metrics;
