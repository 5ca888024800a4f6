// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod catalog;
pub mod exists;
pub mod get;
pub mod list;
pub mod publish;
pub mod put;
pub mod query;
pub mod remove;
pub mod show;

pub use catalog::catalog_command;
pub use exists::exists_command;
pub use get::get_command;
pub use list::list_command;
pub use publish::publish_command;
pub use put::put_command;
pub use query::query_command;
pub use remove::remove_command;
pub use show::show_command;
