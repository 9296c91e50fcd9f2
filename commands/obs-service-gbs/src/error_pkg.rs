// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! The error package
//!
//! Instead of failing, the service can leave a package behind that fails to
//! build and shows the error message in the OBS build log.

use std::path::Path;

// ----------------------------------------------------------------------
// - Constants:
// ----------------------------------------------------------------------

const ERROR_FILE: &str = "service-error";
const SPEC_FILE: &str = "service-error.spec";

const SPEC: &str = "Name:           service-error
Summary:        Source service failure
Version:        1
Release:        1
License:        GPL-3.0+
Source0:        service-error

%description
The source service failed, see the build log for the error message.

%prep
cat %{SOURCE0}
exit 1

%build

%install

%files
";

// ----------------------------------------------------------------------
// - Functions:
// ----------------------------------------------------------------------

/// Write the error package for `message` into `outdir`
pub(crate) fn write_error_pkg(outdir: &Path, message: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(outdir)?;
    std::fs::write(outdir.join(ERROR_FILE), format!("{}\n", message.trim_end()))?;
    std::fs::write(outdir.join(SPEC_FILE), SPEC)?;

    tracing::debug!("Error package written to \"{}\".", outdir.to_string_lossy());
    Ok(())
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
