/// TMDB movie genre ids as returned in list results (`genre_ids`)
const MOVIE_GENRES: [(u32, &str); 19] = [
    (28, "Ação"),
    (12, "Aventura"),
    (16, "Animação"),
    (35, "Comédia"),
    (80, "Crime"),
    (99, "Documentário"),
    (18, "Drama"),
    (10751, "Família"),
    (14, "Fantasia"),
    (36, "História"),
    (27, "Terror"),
    (10402, "Música"),
    (9648, "Mistério"),
    (10749, "Romance"),
    (878, "Ficção científica"),
    (10770, "Cinema TV"),
    (53, "Thriller"),
    (10752, "Guerra"),
    (37, "Faroeste"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    MOVIE_GENRES.iter().find(|(gid, _)| *gid == id).map(|(_, name)| *name)
}

/// Join known genre names; unknown ids are skipped
pub fn genre_names(ids: &[u32]) -> String {
    ids.iter()
        .filter_map(|id| genre_name(*id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_names() {
        assert_eq!(genre_name(878), Some("Ficção científica"));
        assert_eq!(genre_names(&[28, 999, 18]), "Ação, Drama");
        assert_eq!(genre_names(&[]), "");
    }
}
