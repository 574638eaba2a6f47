use super::chain::{storage_chain, TableLevel};
use super::criteria::{ColumnResolver, Criteria, OrderCriteria};
use super::mapper::SqlMapper;
use super::statement::SqlStatement;
use crate::definition::class::ClassDef;
use crate::error::MapError;
use sea_query::Value;

/// What a SELECT returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Projection {
    Columns,
    Count,
}

impl SqlMapper {
    /// SELECT over every table of the class's storage chain
    ///
    /// Projection columns are table-qualified and sorted by property name. Tables are
    /// listed most-derived first. The WHERE clause holds one join predicate per
    /// foreign key column (leaf join first), then discriminator filters, then
    /// `criteria`.
    pub fn build_select(&self, class: &ClassDef, criteria: Option<&Criteria>) -> Result<SqlStatement, MapError> {
        self.select_from(class, Projection::Columns, criteria, &OrderCriteria::new())
    }

    /// [`build_select`](Self::build_select) followed by an ORDER BY clause
    pub fn build_select_ordered(
        &self,
        class: &ClassDef,
        criteria: Option<&Criteria>,
        order: &OrderCriteria,
    ) -> Result<SqlStatement, MapError> {
        self.select_from(class, Projection::Columns, criteria, order)
    }

    /// `SELECT COUNT(*)` over the same source as [`build_select`](Self::build_select)
    pub fn build_count(&self, class: &ClassDef, criteria: Option<&Criteria>) -> Result<SqlStatement, MapError> {
        self.select_from(class, Projection::Count, criteria, &OrderCriteria::new())
    }

    pub(crate) fn select_from(
        &self,
        class: &ClassDef,
        projection: Projection,
        criteria: Option<&Criteria>,
        order: &OrderCriteria,
    ) -> Result<SqlStatement, MapError> {
        let chain = storage_chain(class);
        let columns = ColumnResolver::new(&chain, &self.formatter);
        let mut statement = SqlStatement::new();

        statement.push_str("SELECT ");
        match projection {
            Projection::Columns => statement.push_str(&self.projection(&chain).join(", ")),
            Projection::Count => statement.push_str("COUNT(*)"),
        }

        statement.push_str(" FROM ");
        let tables: Vec<String> = chain.iter().map(|l| self.formatter.delimit(l.table())).collect();
        statement.push_str(&tables.join(", "));

        let mut predicates = 0;
        let mut next_predicate = |statement: &mut SqlStatement| {
            statement.push_str(if predicates == 0 { " WHERE " } else { " AND " });
            predicates += 1;
        };

        for pair in chain.windows(2) {
            let (child, parent) = (&pair[0], &pair[1]);
            for fk in child.parent_key() {
                next_predicate(&mut statement);
                statement.push_str(&self.formatter.qualified(parent.table(), fk.column_name()));
                statement.push_str(" = ");
                statement.push_str(&self.formatter.qualified(child.table(), fk.column_name()));
            }
        }

        for level in &chain {
            if let Some((column, class_name)) = level.discriminator() {
                next_predicate(&mut statement);
                statement.push_str(&self.formatter.qualified(level.table(), column));
                statement.push_str(" = ");
                statement.push_param(&self.formatter, Value::from(class_name));
            }
        }

        if let Some(criteria) = criteria {
            next_predicate(&mut statement);
            criteria.render(&columns, &mut statement)?;
        }

        order.render(&columns, &mut statement)?;

        log::debug!("Built SELECT for '{}' over {} table(s)", class.class_name(), chain.len());
        Ok(statement)
    }

    fn projection(&self, chain: &[TableLevel<'_>]) -> Vec<String> {
        let mut projected: Vec<(&str, String)> = Vec::new();
        for level in chain {
            for prop in level.properties() {
                projected.push((prop.name(), self.formatter.qualified(level.table(), prop.column_name())));
            }
        }
        projected.sort_by(|a, b| a.0.cmp(b.0));
        projected.into_iter().map(|(_, column)| column).collect()
    }
}
