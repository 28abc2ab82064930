use anyhow::Context;
use rand::{Rng, seq::SliceRandom};
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// A randomly picked image: the base filename and an open handle to it. The
/// handle stays open until the picked image is dropped.
pub struct PickedImage {
    pub filename: String,
    pub file: File,
}

/// Picks one file uniformly at random from the combined contents of `dirs`
/// and opens it for reading.
pub async fn random_image(dirs: &[PathBuf]) -> anyhow::Result<PickedImage> {
    let pool = candidate_pool(dirs).await?;
    let path = pick(&pool, &mut rand::thread_rng())?.clone();

    let file = File::open(&path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(PickedImage {
        filename: base_name(&path),
        file,
    })
}

/// Lists every entry of every directory (non-recursively) into one flat pool.
/// Rebuilt from scratch on each call so that files added or removed between
/// picks are reflected immediately.
async fn candidate_pool(dirs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut pool = vec![];
    for dir in dirs {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("failed to list {}", dir.display()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to list {}", dir.display()))?
        {
            pool.push(entry.path());
        }
    }
    Ok(pool)
}

/// Uniform selection from the pool. An empty pool is an error, not a panic.
fn pick<'a>(pool: &'a [PathBuf], rng: &mut impl Rng) -> anyhow::Result<&'a PathBuf> {
    pool.choose(rng).context("no images available")
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    #[test]
    fn pick_returns_a_member_of_the_pool() {
        let pool: Vec<PathBuf> = ["a.png", "b.png", "c.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let picked = pick(&pool, &mut rng).unwrap();
            assert!(pool.contains(picked));
        }
    }

    #[test]
    fn pick_eventually_selects_every_member() {
        let pool: Vec<PathBuf> = ["a.png", "b.png", "c.png", "d.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..500).map(|_| pick(&pool, &mut rng).unwrap()).collect();
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn pick_from_an_empty_pool_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(pick(&[], &mut rng).is_err());
    }

    #[tokio::test]
    async fn pool_combines_all_directories() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        std::fs::write(dir_a.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir_a.path().join("b.png"), b"b").unwrap();
        std::fs::write(dir_b.path().join("c.png"), b"c").unwrap();

        let pool = candidate_pool(&[dir_a.path().to_owned(), dir_b.path().to_owned()])
            .await
            .unwrap();
        let names: HashSet<_> = pool.iter().map(|p| base_name(p)).collect();
        assert_eq!(
            names,
            HashSet::from(["a.png".to_owned(), "b.png".to_owned(), "c.png".to_owned()])
        );
    }

    #[tokio::test]
    async fn unlistable_directory_fails_the_pick() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        let missing = dir.path().join("does-not-exist");

        assert!(
            candidate_pool(&[dir.path().to_owned(), missing])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn random_image_returns_the_base_filename_and_an_open_handle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"meow").unwrap();

        let picked = random_image(&[dir.path().to_owned()]).await.unwrap();
        assert_eq!(picked.filename, "cat.png");

        use tokio::io::AsyncReadExt;
        let mut contents = vec![];
        let mut file = picked.file;
        file.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"meow");
    }

    #[tokio::test]
    async fn random_image_with_no_candidates_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(random_image(&[dir.path().to_owned()]).await.is_err());
    }
}
