use crate::normalize::Extract;
use crate::record::{League, MatchRecord};

#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub input_rows: Vec<(League, usize)>,
    pub output_rows: usize,
}

/// Concatenates the normalized extracts into one flat dataset. Every input row
/// survives: no dedup, no join. Consumers must not rely on the resulting
/// ordering.
pub fn union(extracts: Vec<Extract>) -> (Vec<MatchRecord>, MergeSummary) {
    let mut input_rows = Vec::with_capacity(extracts.len());
    let mut rows = Vec::new();
    for extract in extracts {
        input_rows.push((extract.league, extract.rows.len()));
        rows.extend(extract.rows);
    }
    let output_rows = rows.len();
    (rows, MergeSummary {
        input_rows,
        output_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::normalize::normalize_extract;

    const HEADER: &str = "Div,Date,Time,HomeTeam,AwayTeam,FTHG,FTAG,FTR,HTHG,HTAG,HTR,\
HS,AS,HST,AST,HF,AF,HC,AC,HY,AY,HR,AR,\
B365H,B365D,B365A,BWH,BWD,BWA,IWH,IWD,IWA,PSH,PSD,PSA,WHH,WHD,WHA,VCH,VCD,VCA,\
MaxH,MaxD,MaxA,AvgH,AvgD,AvgA,\
B365>2.5,B365<2.5,P>2.5,P<2.5,Max>2.5,Max<2.5,Avg>2.5,Avg<2.5,\
AHh,B365AHH,B365AHA,PAHH,PAHA,MaxAHH,MaxAHA,AvgAHH,AvgAHA";

    fn extract_with_rows(league: League, teams: &[(&str, &str)]) -> Extract {
        let mut csv = String::from(HEADER);
        for (home, away) in teams {
            csv.push('\n');
            csv.push_str(&format!(
                "{},10/02/2024,15:00,{home},{away},1,1,D,0,0,D,\
10,10,4,4,12,12,5,5,1,1,0,0,\
2.50,3.30,2.90,2.50,3.30,2.90,2.50,3.30,2.90,2.50,3.30,2.90,2.50,3.30,2.90,2.50,3.30,2.90,\
2.55,3.35,2.95,2.50,3.30,2.90,\
1.80,2.00,1.82,2.02,1.85,2.05,1.81,2.01,\
0.00,1.90,2.00,1.92,1.98,1.95,2.02,1.91,1.99",
                league.code()
            ));
        }
        normalize_extract("merge-test.csv", league, csv.as_bytes(), &Catalog::builtin())
            .expect("test extract should normalize")
    }

    #[test]
    fn output_rows_equal_sum_of_inputs() {
        let extracts = vec![
            extract_with_rows(League::England, &[("Arsenal", "Chelsea"), ("Everton", "Fulham")]),
            extract_with_rows(League::Spain, &[("Betis", "Sevilla")]),
            extract_with_rows(League::Italy, &[("Milan", "Inter"), ("Roma", "Lazio"), ("Genoa", "Torino")]),
        ];
        let expected: usize = extracts.iter().map(|e| e.rows.len()).sum();

        let (rows, summary) = union(extracts);
        assert_eq!(rows.len(), 6);
        assert_eq!(summary.output_rows, expected);
        assert_eq!(
            summary.input_rows,
            vec![(League::England, 2), (League::Spain, 1), (League::Italy, 3)]
        );
    }

    #[test]
    fn rows_keep_their_league_identity() {
        let extracts = vec![
            extract_with_rows(League::Germany, &[("Bayern", "Dortmund")]),
            extract_with_rows(League::France, &[("Lille", "Reims")]),
        ];
        let (rows, _) = union(extracts);
        assert_eq!(rows[0].league, League::Germany);
        assert_eq!(rows[1].league, League::France);
    }
}
