//! Cellar - resolve secret references into a child process environment.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── access        # Print a secret
//! │   ├── bootstrap     # Create a collection and identity
//! │   ├── secrets       # create / update / delete
//! │   ├── edit          # Edit a secret in $EDITOR
//! │   ├── exec          # Run a command with resolved secrets
//! │   ├── list          # List secrets in a collection
//! │   ├── members       # grant / revoke
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── reference     # Locator and env reference grammar
//!     ├── input         # @file / - / \literal data tokens
//!     ├── exit          # Exit outcome taxonomy
//!     ├── config        # Settings from flags, env and config file
//!     ├── context       # Cancellation
//!     ├── cipher        # age encryption
//!     ├── identity      # age identity file
//!     ├── store/        # SecretStore trait and filesystem store
//!     ├── runtime       # Runtime environment detection
//!     ├── env           # Environment resolution
//!     └── supervisor    # Child process supervision and signal relay
//! ```
//!
//! # Exit codes
//!
//! - `0` success
//! - `60` the secret store was reached and failed
//! - `61` misuse: bad arguments, bad references, local failures
//! - anything else: the exit code of the supervised child

pub mod cli;
pub mod core;
pub mod error;
