pub use {anyhow,
         arcstr,
         bio,
         hashbrown,
         itertools,
         log,
         multimap,
         pretty_env_logger,
         rayon,
         serde,
         serde_json};
