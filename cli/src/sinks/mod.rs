// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Reference [`pex_core::Sink`] implementations (§6). Neither is part of
//! the simulation core: the core only needs the trait.

pub mod file;
pub mod timeseries;
