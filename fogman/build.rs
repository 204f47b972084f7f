// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

fn main() {
    buildinfo::generate_version_info();
}
